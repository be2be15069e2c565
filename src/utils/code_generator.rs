use rand::Rng;

/// Six-digit numeric code for activation, verification and password reset mails.
pub fn generate_six_digit_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(100000..=999999))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_six_digit_code() {
        let code = generate_six_digit_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let code_num: u32 = code.parse().unwrap();
        assert!((100000..=999999).contains(&code_num));
    }
}
