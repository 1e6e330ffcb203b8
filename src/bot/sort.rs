use teloxide::types::MessageId;

use super::action::Action;
use super::session::ChatHandle;
use super::view::{button, menu_row, show, Screen};
use super::HandlerResult;
use crate::sort::{BubbleSort, Control, Mark};

#[derive(Debug, Default)]
pub struct SortDemo {
    pub sort: BubbleSort,
    pub region: Option<MessageId>,
}

pub fn screen(sort: &BubbleSort) -> Screen {
    let view = sort.view();
    let bars = view
        .items
        .iter()
        .map(|&(value, mark)| {
            let marker = match mark {
                Mark::Idle => "⬜",
                Mark::Compared => "🟥",
                Mark::Sorted => "🟩",
            };
            format!("{} {:>2} {}", marker, value, "█".repeat(value as usize))
        })
        .collect::<Vec<_>>()
        .join("\n");

    let (status, label) = match view.control {
        Control::Step => ("Bubble sort, one comparison per step.", "▶ Run sort step"),
        Control::Reset => ("Sorted!", "↺ Reset"),
    };
    Screen::new(
        format!("{}\n\n{}", status, bars),
        vec![vec![button(label, Action::SortStep)], menu_row()],
    )
}

/// Opens the visualizer on a fresh sequence.
pub async fn open(handle: ChatHandle) -> HandlerResult {
    let (region, screen) = handle
        .sessions
        .with(handle.chat, |s| {
            s.sort.sort.reset();
            (s.sort.region, screen(&s.sort.sort))
        })
        .await;
    redraw(&handle, region, screen).await
}

pub async fn step(handle: ChatHandle) -> HandlerResult {
    let (region, screen) = handle
        .sessions
        .with(handle.chat, |s| {
            let step = s.sort.sort.advance();
            log::debug!("sort step in chat {}: {:?}", handle.chat.0, step);
            (s.sort.region, screen(&s.sort.sort))
        })
        .await;
    redraw(&handle, region, screen).await
}

async fn redraw(handle: &ChatHandle, region: Option<MessageId>, screen: Screen) -> HandlerResult {
    let id = show(&handle.bot, handle.chat, region, screen).await?;
    handle
        .sessions
        .with(handle.chat, |s| s.sort.region = Some(id))
        .await;
    Ok(())
}
