pub mod dajiala;
