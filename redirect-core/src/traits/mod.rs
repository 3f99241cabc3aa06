pub mod audio_host;
pub mod data_callback;
pub mod redirect_observer;
