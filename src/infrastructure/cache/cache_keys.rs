pub fn user_adjustments_key(user_id: &str) -> String {
    format!("user_adjustments:{}", user_id)
}
