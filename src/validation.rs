// Validation utilities module
// Provides custom validation functions for domain-specific rules

use validator::ValidationError;

/// Validates that a room number is non-empty and plausibly shaped
/// (digits, letters and dashes, at most 10 characters)
pub fn validate_room_number(room: &str) -> Result<(), ValidationError> {
    let trimmed = room.trim();
    if trimmed.is_empty() || trimmed.len() > 10 {
        return Err(ValidationError::new("invalid_room_number"));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::new("invalid_room_number"));
    }
    Ok(())
}

/// Validates that an ordered quantity is positive and within a sane bound
pub fn validate_quantity(quantity: i32) -> Result<(), ValidationError> {
    if quantity < 1 || quantity > 99 {
        Err(ValidationError::new("quantity_out_of_range"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_room_numbers() {
        assert!(validate_room_number("101").is_ok());
        assert!(validate_room_number("12A").is_ok());
        assert!(validate_room_number("B-204").is_ok());
    }

    #[test]
    fn test_invalid_room_numbers() {
        assert!(validate_room_number("").is_err());
        assert!(validate_room_number("   ").is_err());
        assert!(validate_room_number("room number one").is_err());
        assert!(validate_room_number("12345678901").is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(99).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(100).is_err());
    }
}
