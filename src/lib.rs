pub mod cli;
pub mod config;
pub mod ctx;
pub mod input;
pub mod io;
pub mod math;
pub mod pipeline;
pub mod schema {
    pub mod v1;
}
pub mod scores;
pub mod spectra;
pub mod table;
