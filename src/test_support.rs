use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use image::{DynamicImage, ImageFormat, RgbImage};

use crate::upload::{
    AssetRef, BlobStore, DeleteError, DeleteResult, ImageBlob, UploadError, UploadResult,
};

pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("png encoding should succeed");
    buffer.into_inner()
}

/// Blob store double: answers uploads from a queue and records every call.
#[derive(Debug, Default)]
pub(crate) struct RecordingStore {
    uploads: Mutex<VecDeque<Result<String, String>>>,
    stored: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    fail_deletes: AtomicBool,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `Ok(location)` answers with a reference, `Err(message)` with a 500.
    pub(crate) fn queue_upload(&self, outcome: Result<&str, &str>) {
        self.uploads
            .lock()
            .expect("uploads lock")
            .push_back(outcome.map(str::to_string).map_err(str::to_string));
    }

    pub(crate) fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub(crate) fn stored_filenames(&self) -> Vec<String> {
        self.stored.lock().expect("stored lock").clone()
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("deleted lock").clone()
    }
}

impl BlobStore for RecordingStore {
    fn store(&self, blob: &ImageBlob) -> UploadResult<AssetRef> {
        self.stored
            .lock()
            .expect("stored lock")
            .push(blob.filename().to_string());
        let outcome = self
            .uploads
            .lock()
            .expect("uploads lock")
            .pop_front()
            .unwrap_or_else(|| Err("no queued upload response".to_string()));
        match outcome {
            Ok(location) => AssetRef::parse(&location).ok_or(UploadError::MissingLocation {
                message: "empty location".to_string(),
            }),
            Err(message) => Err(UploadError::Rejected {
                status: 500,
                message,
            }),
        }
    }

    fn delete(&self, reference: &AssetRef) -> DeleteResult<()> {
        self.deleted
            .lock()
            .expect("deleted lock")
            .push(reference.as_str().to_string());
        if self.fail_deletes.load(Ordering::SeqCst) {
            Err(DeleteError::Rejected { status: 503 })
        } else {
            Ok(())
        }
    }
}
