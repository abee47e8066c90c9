pub mod file_output_adapter;
pub mod http_client;
pub mod in_memory;
