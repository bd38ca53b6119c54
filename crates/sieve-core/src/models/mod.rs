pub mod upload;

pub use upload::{
    FilenamePolicy, StatusResponse, UploadResponse, UploadStatus, UploadTask,
};
