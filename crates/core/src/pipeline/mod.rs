pub mod cluster_faces_use_case;
pub mod face_search_use_case;
pub mod facegrep_config;
pub mod infrastructure;
pub mod search_executor;
