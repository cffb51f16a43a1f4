//! Static sample data shown on the dashboard.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub label: &'static str,
    pub value: &'static str,
    /// Month-over-month change, e.g. `+12%`.
    pub trend: &'static str,
    /// Single glyph shown in the icon bubble.
    pub glyph: &'static str,
    pub tone: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Completed,
    Processing,
    Shipped,
    Pending,
}

impl OrderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Pending => "Pending",
        }
    }

    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::Completed => "badge completed",
            Self::Processing => "badge processing",
            Self::Shipped => "badge shipped",
            Self::Pending => "badge pending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub id: &'static str,
    pub customer: &'static str,
    pub amount: &'static str,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub glyph: &'static str,
    pub active: bool,
}

pub const STATS: [Stat; 4] = [
    Stat {
        label: "Revenue",
        value: "$124,580",
        trend: "+12%",
        glyph: "$",
        tone: "stat-icon primary",
    },
    Stat {
        label: "Customers",
        value: "2,847",
        trend: "+8%",
        glyph: "C",
        tone: "stat-icon accent",
    },
    Stat {
        label: "Orders",
        value: "1,249",
        trend: "+23%",
        glyph: "O",
        tone: "stat-icon success",
    },
    Stat {
        label: "Products",
        value: "189",
        trend: "+2%",
        glyph: "P",
        tone: "stat-icon info",
    },
];

pub const SAMPLE_ORDERS: [Order; 4] = [
    Order {
        id: "ORD-1001",
        customer: "Alice Johnson",
        amount: "$1,200.00",
        status: OrderStatus::Completed,
    },
    Order {
        id: "ORD-1002",
        customer: "Bob Smith",
        amount: "$850.50",
        status: OrderStatus::Processing,
    },
    Order {
        id: "ORD-1003",
        customer: "Carlos Rivera",
        amount: "$340.00",
        status: OrderStatus::Shipped,
    },
    Order {
        id: "ORD-1004",
        customer: "Diana Lee",
        amount: "$2,420.00",
        status: OrderStatus::Pending,
    },
];

pub const NAV_ITEMS: [NavItem; 6] = [
    NavItem { label: "Dashboard", glyph: "▦", active: true },
    NavItem { label: "Customers", glyph: "☺", active: false },
    NavItem { label: "Inventory", glyph: "▣", active: false },
    NavItem { label: "Orders", glyph: "☰", active: false },
    NavItem { label: "Reports", glyph: "◔", active: false },
    NavItem { label: "Schedule", glyph: "◷", active: false },
];
