use uuid::Uuid;

const BASE_62_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// The length of the ids returned by [`unique_id`].
pub const UNIQUE_ID_LEN: usize = 6;

/// Returns a short, random, base-62 id for suffixing resource names so that concurrent scenario
/// runs do not collide. Six characters give roughly 5.7e10 possibilities.
pub fn unique_id() -> String {
    // The low 64 bits of a v4 uuid hold 62 random bits, more than the 36 we consume.
    let mut n = Uuid::new_v4().as_u128();
    (0..UNIQUE_ID_LEN)
        .map(|_| {
            let c = BASE_62_CHARS[(n % 62) as usize] as char;
            n /= 62;
            c
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_base_62() {
        let id = unique_id();
        assert_eq!(id.len(), UNIQUE_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()), "{}", id);
    }

    #[test]
    fn ids_do_not_collide() {
        let ids: HashSet<String> = (0..1000).map(|_| unique_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
