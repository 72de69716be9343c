/// A block size or unit count parsed from a command-line value like "512", "1K" or "2MB".
///
/// Suffixes follow dd conventions: `c` (characters), `w` (words), `b` (512-byte
/// blocks), single letters `K`/`M`/`G`/`T` for powers of 1024 (an `iB` form is also
/// accepted), and the `kB`/`MB`/`GB`/`TB` forms for powers of 1000.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct UnitSize {
    pub bytes: u64,
}

impl std::str::FromStr for UnitSize {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Split into the leading number and the trailing suffix
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (number, suffix) = s.split_at(split);
        if number.is_empty() {
            return Err(format!("Missing number in size '{}'", s));
        }
        let number: u64 = number.parse().map_err(|_| format!("Invalid number in size '{}'", s))?;

        let multiplier: u64 = match suffix {
            "" | "c" => 1,
            "w" => 2,
            "b" => 512,
            "k" | "K" | "KiB" => 1 << 10,
            "M" | "MiB" => 1 << 20,
            "G" | "GiB" => 1 << 30,
            "T" | "TiB" => 1 << 40,
            "kB" | "KB" => 1000,
            "MB" => 1000_u64.pow(2),
            "GB" => 1000_u64.pow(3),
            "TB" => 1000_u64.pow(4),
            _ => return Err(format!("Unknown size suffix '{}' in '{}'", suffix, s)),
        };

        match number.checked_mul(multiplier) {
            Some(bytes) => Ok(UnitSize { bytes }),
            None => Err(format!("Size '{}' is too large", s)),
        }
    }
}

impl std::fmt::Display for UnitSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.bytes)
    }
}
