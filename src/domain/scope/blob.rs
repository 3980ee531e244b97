//! Packed per-domain scope bits

/// Location of a single scope bit inside a domain blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitPosition {
    /// Byte offset within the blob
    pub offset: usize,
    /// Mask selecting the bit within that byte
    pub mask: u8,
}

impl BitPosition {
    pub fn for_index(index: u32) -> Self {
        Self {
            offset: (index / 8) as usize,
            mask: 1u8 << (index % 8),
        }
    }
}

/// Granted scope bits for every domain on one token, in insertion order.
///
/// Bit `i` of a domain's byte sequence is set when scope index `i` is granted.
/// Sequences never carry trailing zero bytes and a missing domain grants
/// nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainBlobs {
    entries: Vec<(String, Vec<u8>)>,
}

impl DomainBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the raw bytes for a domain
    pub fn insert(&mut self, domain: impl Into<String>, mut bytes: Vec<u8>) {
        let domain = domain.into();
        trim_trailing_zeros(&mut bytes);
        match self.position(&domain) {
            Some(idx) => self.entries[idx].1 = bytes,
            None => self.entries.push((domain, bytes)),
        }
    }

    pub fn get(&self, domain: &str) -> Option<&[u8]> {
        self.position(domain).map(|idx| self.entries[idx].1.as_slice())
    }

    /// Sets the bit for `index`, growing the domain's blob when needed
    pub fn grant(&mut self, domain: &str, index: u32) {
        let bit = BitPosition::for_index(index);
        let idx = match self.position(domain) {
            Some(idx) => idx,
            None => {
                self.entries.push((domain.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        let bytes = &mut self.entries[idx].1;
        if bytes.len() < bit.offset + 1 {
            bytes.resize(bit.offset + 1, 0);
        }
        bytes[bit.offset] |= bit.mask;
    }

    /// Clears the bit for `index`; a no-op when the bit was never set
    pub fn revoke(&mut self, domain: &str, index: u32) {
        let bit = BitPosition::for_index(index);
        let Some(idx) = self.position(domain) else {
            return;
        };
        let bytes = &mut self.entries[idx].1;
        if let Some(byte) = bytes.get_mut(bit.offset) {
            *byte &= !bit.mask;
            trim_trailing_zeros(bytes);
        }
    }

    pub fn contains(&self, domain: &str, index: u32) -> bool {
        let bit = BitPosition::for_index(index);
        self.get(domain)
            .and_then(|bytes| bytes.get(bit.offset))
            .map(|byte| byte & bit.mask == bit.mask)
            .unwrap_or(false)
    }

    /// Domains with at least one granted bit, with their bytes
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .filter(|(_, bytes)| !bytes.is_empty())
            .map(|(domain, bytes)| (domain.as_str(), bytes.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    fn position(&self, domain: &str) -> Option<usize> {
        self.entries.iter().position(|(d, _)| d == domain)
    }
}

fn trim_trailing_zeros(bytes: &mut Vec<u8>) {
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
}
