//! RC4 stream cipher backing the `RC4K` and `RC4C` opcodes.
//!
//! One instance lives inside each VM. Key setup runs the standard
//! key-scheduling algorithm and resets the generator indices; ciphering runs
//! the standard pseudo-random generation loop and leaves the permutation
//! where it stopped, so consecutive calls continue one keystream.

use tracing::debug;

/// RC4 permutation state and generator indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rc4 {
    s: [u8; 256],
    i: u8,
    j: u8,
}

impl Default for Rc4 {
    /// An unkeyed generator: identity permutation, indices at zero.
    fn default() -> Self {
        let mut s = [0u8; 256];
        for (i, slot) in s.iter_mut().enumerate() {
            *slot = i as u8;
        }
        Self { s, i: 0, j: 0 }
    }
}

impl Rc4 {
    /// A generator keyed with `key`. See [`Rc4::set_key`].
    pub fn with_key(key: &[u8]) -> Self {
        let mut rc4 = Self::default();
        rc4.set_key(key);
        rc4
    }

    /// Run key scheduling.
    ///
    /// An empty key is replaced by a single byte drawn from the process RNG.
    pub fn set_key(&mut self, key: &[u8]) {
        let random;
        let key = if key.is_empty() {
            random = [rand::random::<u8>()];
            debug!("rc4: empty key, using a random single-byte key");
            &random[..]
        } else {
            key
        };

        *self = Self::default();
        let mut j: u8 = 0;
        for i in 0..256 {
            j = j.wrapping_add(self.s[i]).wrapping_add(key[i % key.len()]);
            self.s.swap(i, j as usize);
        }
    }

    /// Produce the next keystream byte.
    pub fn next_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.s[self.i as usize]);
        self.s.swap(self.i as usize, self.j as usize);
        let t = self.s[self.i as usize].wrapping_add(self.s[self.j as usize]);
        self.s[t as usize]
    }

    /// Fill `keystream` and write `input ^ keystream` to `output`.
    ///
    /// Buffer form of what `RC4C` does inside the data section, for
    /// embedders holding their own buffers. The opcode cannot borrow three
    /// regions of one section at once, so it drives [`Rc4::next_byte`]
    /// directly; both produce the same bytes for the same key.
    ///
    /// Processes as many bytes as the shortest of the three slices.
    pub fn cipher(&mut self, input: &[u8], output: &mut [u8], keystream: &mut [u8]) {
        for ((out, ks), byte) in output.iter_mut().zip(keystream.iter_mut()).zip(input) {
            *ks = self.next_byte();
            *out = *ks ^ byte;
        }
    }
}

/// Recover bytes produced by [`Rc4::cipher`] from a saved keystream.
///
/// This is the same XOR; it does not advance any generator.
pub fn decipher(input: &[u8], output: &mut [u8], keystream: &[u8]) {
    for ((out, ks), byte) in output.iter_mut().zip(keystream).zip(input) {
        *out = ks ^ byte;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn keystream_vector_01_to_08() {
        let mut rc4 = Rc4::with_key(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let input = [0u8; 32];
        let mut out = [0u8; 32];
        let mut ks = [0u8; 32];
        rc4.cipher(&input, &mut out, &mut ks);
        assert_eq!(
            hex(&ks),
            "97ab8a1bf0afb96132f2f67258da15a88263efdb45c4a18684ef87e6b19e5b09"
        );
        assert_eq!(out, ks);
    }

    #[test]
    fn plaintext_vector() {
        let mut rc4 = Rc4::with_key(b"Key");
        let mut out = [0u8; 9];
        let mut ks = [0u8; 9];
        rc4.cipher(b"Plaintext", &mut out, &mut ks);
        assert_eq!(hex(&out), "bbf316e8d940af0ad3");
    }

    #[test]
    fn attack_at_dawn_vector() {
        let mut rc4 = Rc4::with_key(b"Secret");
        let mut out = [0u8; 14];
        let mut ks = [0u8; 14];
        rc4.cipher(b"Attack at dawn", &mut out, &mut ks);
        assert_eq!(hex(&out), "45a01f645fc35b383552544b9bf5");
    }

    #[test]
    fn consecutive_calls_continue_the_stream() {
        let mut whole = Rc4::with_key(b"Key");
        let mut ks_whole = [0u8; 16];
        let mut out = [0u8; 16];
        whole.cipher(&[0u8; 16], &mut out, &mut ks_whole);

        let mut split = Rc4::with_key(b"Key");
        let mut ks_a = [0u8; 6];
        let mut ks_b = [0u8; 10];
        split.cipher(&[0u8; 6], &mut [0u8; 6], &mut ks_a);
        split.cipher(&[0u8; 10], &mut [0u8; 10], &mut ks_b);

        assert_eq!(&ks_whole[..6], &ks_a);
        assert_eq!(&ks_whole[6..], &ks_b);
    }

    #[test]
    fn rekey_restarts_the_stream() {
        let mut rc4 = Rc4::with_key(b"Key");
        let first: Vec<u8> = (0..4).map(|_| rc4.next_byte()).collect();
        rc4.set_key(b"Key");
        let again: Vec<u8> = (0..4).map(|_| rc4.next_byte()).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn decipher_inverts_cipher() {
        let mut rc4 = Rc4::with_key(b"Secret");
        let mut ct = [0u8; 14];
        let mut ks = [0u8; 14];
        rc4.cipher(b"Attack at dawn", &mut ct, &mut ks);

        let mut pt = [0u8; 14];
        decipher(&ct, &mut pt, &ks);
        assert_eq!(&pt, b"Attack at dawn");
    }

    #[test]
    fn empty_key_still_schedules() {
        let mut rc4 = Rc4::with_key(&[]);
        assert_ne!(rc4, Rc4::default());
        // The permutation stays a permutation.
        let mut seen = [false; 256];
        for &b in rc4.s.iter() {
            seen[b as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
        rc4.next_byte();
    }

    #[test]
    fn unkeyed_starts_from_identity() {
        let rc4 = Rc4::default();
        assert!(rc4.s.iter().enumerate().all(|(i, &b)| b as usize == i));
    }
}
