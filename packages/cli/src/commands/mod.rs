pub mod apply;
pub mod check_ids;
pub mod find;
pub mod init;
pub mod validate;

pub use apply::{apply, ApplyArgs};
pub use check_ids::{check_ids, CheckIdsArgs};
pub use find::{find, FindArgs};
pub use init::{init, InitArgs};
pub use validate::{validate, ValidateArgs};
