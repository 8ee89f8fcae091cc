pub mod cli;
pub mod io;
pub mod lifecycle;
pub mod model;
pub mod ops;
pub mod parse;
pub mod util;
