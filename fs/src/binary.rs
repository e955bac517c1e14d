use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::{FsError, open_file};

const SAMPLE_SIZE: usize = 8 * 1024;

/// Share of control bytes above which a sample counts as binary, in percent.
const CONTROL_THRESHOLD_PERCENT: usize = 30;

/// Classifies a byte sample. Empty input is text.
pub fn is_binary(sample: &[u8]) -> bool {
    let sample = &sample[..sample.len().min(SAMPLE_SIZE)];
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }
    let control = sample
        .iter()
        .filter(|&&byte| byte < 0x20 && !matches!(byte, b'\n' | b'\r' | b'\t' | 0x0c | 0x1b))
        .count();
    control * 100 > sample.len() * CONTROL_THRESHOLD_PERCENT
}

/// Classifies the head of a file.
pub async fn is_binary_file(path: impl AsRef<Path>) -> Result<bool, FsError> {
    let path = path.as_ref();
    let file = open_file(path).await?;
    let mut sample = Vec::with_capacity(SAMPLE_SIZE);
    file.take(SAMPLE_SIZE as u64)
        .read_to_end(&mut sample)
        .await
        .map_err(|source| FsError::ReadFile {
            path: path.to_owned(),
            source,
        })?;
    Ok(is_binary(&sample))
}
