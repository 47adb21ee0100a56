/// Builds a 256-entry membership table from the given byte-string sets at
/// compile time.  Used for the hot per-byte classification loops in the
/// scanners and the serializer.
pub(crate) const fn character_set(sets: &[&[u8]]) -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < sets.len() {
        let set = sets[i];
        let mut j = 0;
        while j < set.len() {
            table[set[j] as usize] = true;
            j += 1;
        }
        i += 1;
    }
    table
}
