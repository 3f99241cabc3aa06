pub mod gain;
pub mod ring_buffer;
