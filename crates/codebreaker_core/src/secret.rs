//! Random secret generation.

use rand::Rng;
use tracing::{debug, instrument};

use crate::code::Secret;
use crate::palette::{Color, N_COLORS};

/// Draws a secret of `length` slots from the thread-local generator.
///
/// Each slot is drawn independently and uniformly from the palette, so
/// repeated colors are possible.
#[instrument]
pub fn generate_secret(length: usize) -> Secret {
    generate_secret_with(&mut rand::rng(), length)
}

/// Draws a secret of `length` slots from the supplied generator.
#[instrument(skip(rng))]
pub fn generate_secret_with<R: Rng + ?Sized>(rng: &mut R, length: usize) -> Secret {
    let colors: Vec<Color> = (0..length)
        .map(|_| Color::from_index(rng.random_range(0..N_COLORS)).unwrap_or_default())
        .collect();
    debug!(length, "Generated secret");
    Secret::new(colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_secret_has_requested_length() {
        for length in 1..=8 {
            assert_eq!(generate_secret(length).len(), length);
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate_secret_with(&mut StdRng::seed_from_u64(7), 5);
        let b = generate_secret_with(&mut StdRng::seed_from_u64(7), 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_color_is_eventually_drawn() {
        let mut rng = StdRng::seed_from_u64(42);
        let secret = generate_secret_with(&mut rng, 600);
        for color in Color::all() {
            assert!(secret.contains(color), "{} never drawn", color);
        }
    }
}
