// src/validate.rs
//
// Input validation applied before any backend is invoked.

pub const MAX_CODE_BYTES: usize = 50_000;

pub fn validate_code(code: &str) -> Result<(), String> {
    if code.trim().is_empty() {
        return Err("No code provided".into());
    }
    if code.len() > MAX_CODE_BYTES {
        return Err(format!(
            "Code exceeds the {} byte limit ({} bytes)",
            MAX_CODE_BYTES,
            code.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_whitespace_code() {
        assert!(validate_code("").is_err());
        assert!(validate_code("   \n\t  ").is_err());
    }

    #[test]
    fn rejects_oversized_code() {
        let big = "x = 1\n".repeat(10_000);
        assert!(big.len() > MAX_CODE_BYTES);
        let err = validate_code(&big).unwrap_err();
        assert!(err.contains("byte limit"));
    }

    #[test]
    fn accepts_ordinary_code() {
        assert!(validate_code("def f():\n    pass\n").is_ok());
    }
}
