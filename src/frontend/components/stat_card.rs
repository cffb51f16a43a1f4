use crate::frontend::data::Stat;
use dioxus::prelude::*;

#[component]
pub fn StatCard(stat: Stat) -> Element {
    rsx! {
        div { class: "stat-card",
            div {
                div { class: "stat-label", "{stat.label}" }
                div { class: "stat-value", "{stat.value}" }
                div { class: "trend up", "{stat.trend} from last month" }
            }
            div { class: stat.tone, "{stat.glyph}" }
        }
    }
}
