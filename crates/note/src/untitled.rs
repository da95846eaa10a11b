//! Slot allocation for untitled notes.
//! 未命名筆記的槽位配置。

/// Returns the smallest non-negative slot absent from `taken`.
/// 回傳不在輸入集合中的最小非負槽位。
///
/// The slot becomes part of the note's identity for display ("Untitled-2"),
/// so freed slots are reused before new ones are minted.
pub fn next_index(taken: impl IntoIterator<Item = u32>) -> u32 {
    let mut taken: Vec<u32> = taken.into_iter().collect();
    taken.sort_unstable();
    taken.dedup();

    let mut candidate = 0;
    for slot in taken {
        if slot == candidate {
            candidate += 1;
        } else if slot > candidate {
            break;
        }
    }
    candidate
}
