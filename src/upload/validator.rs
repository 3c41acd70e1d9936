use crate::error::ValidationError;
use crate::upload::types::CandidateFile;
use crate::utils::file_size::FileSizeUtils;

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Checks size constraints only. File type is left to the server.
pub fn validate(file: &CandidateFile) -> Result<(), ValidationError> {
    if file.size_bytes > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge {
            size_mb: FileSizeUtils::size_in_mb(file.size_bytes),
        });
    }
    if file.size_bytes == 0 {
        return Err(ValidationError::Empty);
    }
    Ok(())
}

/// Splits a selection into files worth uploading and files rejected locally.
pub fn partition(
    files: Vec<CandidateFile>,
) -> (Vec<CandidateFile>, Vec<(CandidateFile, ValidationError)>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    for file in files {
        match validate(&file) {
            Ok(()) => valid.push(file),
            Err(reason) => invalid.push((file, reason)),
        }
    }
    (valid, invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(name: &str, size: u64) -> CandidateFile {
        CandidateFile::new(name, vec![0u8; 1]).with_declared_size(size)
    }

    #[test]
    fn rejects_oversized_with_size_in_reason() {
        for size in [MAX_FILE_SIZE + 1, 12 * 1024 * 1024, 50 * 1024 * 1024 + 12345] {
            let err = validate(&sized("big.pdf", size)).unwrap_err();
            let expected = format!("{:.2} MB", size as f64 / (1024.0 * 1024.0));
            assert!(matches!(err, ValidationError::TooLarge { .. }));
            assert!(err.to_string().contains(&expected), "{} missing {}", err, expected);
        }
    }

    #[test]
    fn rejects_empty() {
        let err = validate(&CandidateFile::new("empty.pdf", Vec::<u8>::new())).unwrap_err();
        assert_eq!(err, ValidationError::Empty);
    }

    #[test]
    fn accepts_boundary_and_any_extension() {
        assert!(validate(&sized("exact.pdf", MAX_FILE_SIZE)).is_ok());
        assert!(validate(&sized("notes.exe", 1)).is_ok());
    }

    #[test]
    fn partition_keeps_selection_order() {
        let (valid, invalid) = partition(vec![
            sized("a.pdf", 10),
            sized("b.pdf", 0),
            sized("c.pdf", 20),
            sized("d.pdf", MAX_FILE_SIZE * 2),
        ]);
        let names: Vec<_> = valid.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.pdf", "c.pdf"]);
        let rejected: Vec<_> = invalid.iter().map(|(f, _)| f.name.as_str()).collect();
        assert_eq!(rejected, ["b.pdf", "d.pdf"]);
    }
}
