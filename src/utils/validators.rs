use anyhow::{anyhow, Result};

/// Validate username (alphanumeric, hyphens, underscores, 3-30 chars)
pub fn validate_username(username: &str) -> Result<()> {
    if username.len() < 3 || username.len() > 30 {
        return Err(anyhow!("Username must be between 3 and 30 characters"));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(anyhow!(
            "Username can only contain alphanumeric characters, hyphens, and underscores"
        ));
    }

    Ok(())
}

/// Minimal email shape check; real verification is out of scope
pub fn validate_email(email: &str) -> Result<()> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(anyhow!("Invalid email address"));
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.contains(' ') {
        return Err(anyhow!("Invalid email address"));
    }

    Ok(())
}

/// Validate a city name (letters, spaces, hyphens, 2-40 chars)
pub fn validate_city_name(city: &str) -> Result<()> {
    let trimmed = city.trim();
    if trimmed.len() < 2 || trimmed.len() > 40 {
        return Err(anyhow!("City name must be between 2 and 40 characters"));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-')
    {
        return Err(anyhow!(
            "City name can only contain letters, spaces, and hyphens"
        ));
    }

    Ok(())
}

/// Validate a recorded energy amount in kWh. Zero and negative amounts are
/// meaningless; amounts above 100000 kWh are beyond any residential system.
pub fn validate_energy_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(anyhow!("Energy amount must be a finite number"));
    }
    if amount <= 0.0 {
        return Err(anyhow!("Energy amount must be greater than zero"));
    }
    if amount > 100_000.0 {
        return Err(anyhow!("Energy amount must not exceed 100000 kWh"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ali_raza").is_ok());
        assert!(validate_username("solar-fan-99").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
        assert!(validate_username("user@home").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ali@example.com").is_ok());
        assert!(validate_email("a.b@mail.co").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("user name@example.com").is_err());
    }

    #[test]
    fn test_validate_city_name() {
        assert!(validate_city_name("Lahore").is_ok());
        assert!(validate_city_name("Dera Ghazi Khan").is_ok());
        assert!(validate_city_name("X").is_err());
        assert!(validate_city_name("City123").is_err());
    }

    #[test]
    fn test_validate_energy_amount() {
        assert!(validate_energy_amount(12.5).is_ok());
        assert!(validate_energy_amount(0.0).is_err());
        assert!(validate_energy_amount(-3.0).is_err());
        assert!(validate_energy_amount(f64::NAN).is_err());
        assert!(validate_energy_amount(100_001.0).is_err());
    }
}
