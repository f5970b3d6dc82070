use birdgate::cookies::{CookieKey, SESSION_KEY_ENV};
use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;

    let encoded = CookieKey::generate().to_base64();

    println!("Generated session cookie key:");
    println!("{}", encoded);
    println!();
    println!("You can use this key as your {} environment variable.", SESSION_KEY_ENV);
    println!("For example, add the following to your .env file:");
    println!("{}=\"{}\"", SESSION_KEY_ENV, encoded);

    Ok(())
}
