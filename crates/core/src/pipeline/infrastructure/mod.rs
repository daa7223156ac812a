pub mod component_factory;
pub mod threaded_search_executor;
