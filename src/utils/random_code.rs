use rand::Rng;

// 去掉易混淆的 0/O、1/I/L
const CODE_CHARSET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHJKMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";

fn random_from(charset: &[u8], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

/// 生成班级邀请码
pub fn generate_random_code(len: usize) -> String {
    random_from(CODE_CHARSET, len)
}

/// 生成初始管理员密码，保证同时含大小写字母与数字
pub fn generate_random_password(len: usize) -> String {
    let len = len.max(8);
    loop {
        let candidate = random_from(PASSWORD_CHARSET, len);
        if candidate.chars().any(|c| c.is_ascii_uppercase())
            && candidate.chars().any(|c| c.is_ascii_lowercase())
            && candidate.chars().any(|c| c.is_ascii_digit())
        {
            return candidate;
        }
    }
}
