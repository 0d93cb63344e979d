pub mod asset;
pub mod user;

pub use asset::ReportRow;
pub use user::UserRecord;
