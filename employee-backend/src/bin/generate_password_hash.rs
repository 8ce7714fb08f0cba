use employee_backend::utils::password::{Argon2Config, PasswordHasher, PasswordManager};
use employee_backend::utils::validation::validate_password_strength;
use std::env;
use std::io::{self, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let password = match env::args().nth(1) {
        // コマンドライン引数からパスワードを取得
        Some(password) => password,
        None => {
            // インタラクティブにパスワードを入力
            print!("Enter password to hash: ");
            io::stdout().flush()?;

            let mut password = String::new();
            io::stdin().read_line(&mut password)?;
            password.trim().to_string()
        }
    };

    // パスワードが空でないかチェック
    if password.is_empty() {
        eprintln!("Error: Password cannot be empty");
        std::process::exit(1);
    }

    if let Err(e) = validate_password_strength(&password) {
        eprintln!(
            "Warning: {}",
            e.message.as_deref().unwrap_or("password does not meet the strength policy")
        );
    }

    let manager = PasswordManager::new(Argon2Config::from_env())?;
    let password_hash = manager.hash(&password)?;

    println!("\n=== Password Hash Generated ===");
    println!("Hash: {}", password_hash);
    Ok(())
}
