pub mod charset;
pub mod cli;
pub mod config;
pub mod convert;
pub mod detect;
pub mod error;
pub mod report;
pub mod sample;
pub mod util;

pub use charset::Charset;
pub use convert::{ConversionEngine, ConversionRequest, ConversionTask};
pub use detect::{Detection, EncodingDetector, EncodingLabel};
pub use error::{ConversionCause, Error};
pub use report::ConversionOutcome;
