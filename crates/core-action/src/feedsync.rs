//! Cursor hand-off between a pushed sub-evaluator Level and whatever Level
//! pushed it (spec.md §4.E's `Feed::array_index`/`set_array_index` doc
//! comment: "two Levels cooperatively advance one shared array feed without
//! literally sharing the `Feed` value").
//!
//! A sub-Level reading the same array as its caller (a GROUP! body, a
//! SET-WORD right-hand side, one argument's worth of fulfillment) is always
//! pushed directly on top of the Level that wants its cursor back, so the
//! stack predecessor of a completing Level is always the Level to resync —
//! no explicit parent pointer needed.

use core_level::{LevelId, LevelStack};
use core_trampoline::Bounce;
use core_value::Cell;

pub(crate) fn propagate_feed_to_predecessor(stack: &mut LevelStack, id: LevelId) {
    if id.0 == 0 {
        return;
    }
    let parent_id = LevelId(id.0 - 1);
    let feed = stack.get(id).feed.clone();
    stack.get_mut(parent_id).feed = feed;
}

/// Complete the Level at `id` with `output`, resyncing its feed cursor back
/// to its stack predecessor first.
pub(crate) fn finish(stack: &mut LevelStack, id: LevelId, output: Cell) -> Bounce {
    propagate_feed_to_predecessor(stack, id);
    Bounce::Value(output)
}
