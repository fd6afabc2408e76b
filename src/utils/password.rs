use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Seul tag d'algorithme accepté dans un enregistrement de mot de passe
pub const ALGORITHM_TAG: &str = "pbkdf2sha256";

const ITERATIONS: u32 = 200_000;
const KEY_LENGTH: usize = 32;
const SALT_BYTES: usize = 16;

/// Hash un mot de passe au format `pbkdf2sha256$iterations$salt$digest`
/// Le salt est une chaîne hex de 32 caractères, utilisée telle quelle (texte ASCII)
pub fn hash_password(password: &str) -> String {
    hash_password_with(password, ITERATIONS)
}

pub(crate) fn hash_password_with(password: &str, iterations: u32) -> String {
    let mut salt_bytes = [0u8; SALT_BYTES];
    rand::thread_rng().fill(&mut salt_bytes);
    let salt = hex::encode(salt_bytes);

    let digest = derive_digest(password, &salt, iterations);
    format!("{ALGORITHM_TAG}${iterations}${salt}${digest}")
}

/// Vérifie un mot de passe contre un enregistrement stocké
/// Un enregistrement mal formé renvoie toujours false, jamais une erreur
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let parts: Vec<&str> = stored_hash.split('$').collect();
    let [algorithm, iterations, salt, digest] = parts.as_slice() else {
        return false;
    };

    if *algorithm != ALGORITHM_TAG {
        return false;
    }

    let iterations = match iterations.parse::<u32>() {
        Ok(0) | Err(_) => return false,
        Ok(n) => n,
    };

    derive_digest(password, salt, iterations) == *digest
}

fn derive_digest(password: &str, salt: &str, iterations: u32) -> String {
    let mut key = [0u8; KEY_LENGTH];
    // KEY_LENGTH est toujours valide pour HMAC-SHA256
    if pbkdf2::<HmacSha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key).is_err() {
        return String::new();
    }
    hex::encode(key)
}
