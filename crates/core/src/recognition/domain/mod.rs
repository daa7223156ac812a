pub mod chinese_whispers;
pub mod embedding;
pub mod embedding_network;
pub mod face_grouper;
pub mod face_recogniser;
pub mod jitter;
