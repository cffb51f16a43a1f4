//! Recent orders table.

use crate::frontend::data::SAMPLE_ORDERS;
use dioxus::prelude::*;

#[component]
pub fn OrdersTable() -> Element {
    rsx! {
        section { class: "orders",
            h3 { "Recent Orders" }
            table {
                thead {
                    tr {
                        th { "Order ID" }
                        th { "Customer" }
                        th { "Amount" }
                        th { "Status" }
                    }
                }
                tbody {
                    for order in SAMPLE_ORDERS {
                        tr { key: "{order.id}",
                            td { "{order.id}" }
                            td { "{order.customer}" }
                            td { "{order.amount}" }
                            td {
                                span { class: order.status.badge_class(), "{order.status.label()}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
