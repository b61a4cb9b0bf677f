#![allow(dead_code)]

pub mod config;
pub mod mock_elevenlabs;
pub mod server;
