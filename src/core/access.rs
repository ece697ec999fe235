//! Screen access rules.
//!
//! Navigation never fails: a request the session may not satisfy is resolved to a
//! screen it can see, with a notice explaining the redirect.

use crate::core::auth::{Role, Session};
use crate::entities::order;
use serde::Serialize;
use std::fmt;

/// Screens of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "lowercase")]
pub enum Screen {
    /// Sign-in form
    Login,
    /// Table grid and takeaway list
    Tables,
    /// A single order
    Order {
        /// Order being shown
        id: String,
    },
    /// Kitchen display
    Kitchen,
    /// Stock management
    Inventory,
    /// Sales and expense reports
    Reports,
    /// Expense records
    Expenses,
    /// Staff records
    Employees,
}

impl Screen {
    /// Whether only admins may open the screen.
    #[must_use]
    pub const fn admin_only(&self) -> bool {
        matches!(
            self,
            Self::Inventory | Self::Reports | Self::Expenses | Self::Employees
        )
    }

    /// Whether `role` may open the screen.
    #[must_use]
    pub const fn allowed_for(&self, role: Role) -> bool {
        match self {
            Self::Login => true,
            Self::Tables | Self::Order { .. } => role.can_take_orders(),
            Self::Kitchen => role.can_work_kitchen(),
            Self::Inventory | Self::Reports | Self::Expenses | Self::Employees => {
                role.is_admin()
            }
        }
    }

    /// Where a role lands after signing in.
    #[must_use]
    pub const fn home(role: Role) -> Self {
        match role {
            Role::Kitchen => Self::Kitchen,
            Role::Employee | Role::Admin => Self::Tables,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => f.write_str("login"),
            Self::Tables => f.write_str("tables"),
            Self::Order { id } => write!(f, "order {id}"),
            Self::Kitchen => f.write_str("kitchen"),
            Self::Inventory => f.write_str("inventory"),
            Self::Reports => f.write_str("reports"),
            Self::Expenses => f.write_str("expenses"),
            Self::Employees => f.write_str("employees"),
        }
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    /// Screen to show
    pub screen: Screen,
    /// Message for the user when the request was redirected
    pub notice: Option<String>,
}

impl Navigation {
    const fn to(screen: Screen) -> Self {
        Self {
            screen,
            notice: None,
        }
    }

    fn redirect(screen: Screen, notice: impl Into<String>) -> Self {
        Self {
            screen,
            notice: Some(notice.into()),
        }
    }

    /// Whether the requested screen was replaced.
    #[must_use]
    pub const fn redirected(&self) -> bool {
        self.notice.is_some()
    }
}

/// Decides which screen `session` actually sees when asking for `requested`.
///
/// Without a session every screen resolves to the login form. A signed-in user
/// asking for the login form is sent home.
#[must_use]
pub fn resolve(session: Option<&Session>, requested: Screen) -> Navigation {
    let Some(session) = session else {
        return if requested == Screen::Login {
            Navigation::to(Screen::Login)
        } else {
            Navigation::redirect(Screen::Login, "Please sign in")
        };
    };
    if requested == Screen::Login {
        return Navigation::to(Screen::home(session.role));
    }
    if requested.allowed_for(session.role) {
        return Navigation::to(requested);
    }
    let home = Screen::home(session.role);
    let notice = if requested.admin_only() {
        format!("The {requested} screen is only available to administrators")
    } else {
        format!("The {requested} screen is not available to the {} role", session.role)
    };
    Navigation::redirect(home, notice)
}

/// Resolves a request for an order screen against the current order list.
///
/// Unknown orders and orders that already completed or were cancelled send the user
/// back to the table grid.
#[must_use]
pub fn resolve_order(
    session: Option<&Session>,
    order_id: &str,
    orders: &[order::Model],
) -> Navigation {
    let navigation = resolve(
        session,
        Screen::Order {
            id: order_id.to_string(),
        },
    );
    if navigation.redirected() {
        return navigation;
    }
    match orders.iter().find(|o| o.id == order_id) {
        None => Navigation::redirect(Screen::Tables, format!("Order {order_id} was not found")),
        Some(order) if order.status.is_terminal() => Navigation::redirect(
            Screen::Tables,
            format!("Order {order_id} is already {}", order.status),
        ),
        Some(_) => navigation,
    }
}
