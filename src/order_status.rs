use std::fmt;
use std::io::Write;

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Order fulfillment workflow. Each state has exactly one forward successor;
/// `Cancelled` is reachable from every non-terminal state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Cooking,
    Ready,
    OutForDelivery,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::Cooking => "COOKING",
            OrderStatus::Ready => "READY",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(OrderStatus::Pending),
            "ACCEPTED" => Some(OrderStatus::Accepted),
            "COOKING" => Some(OrderStatus::Cooking),
            "READY" => Some(OrderStatus::Ready),
            "OUT_FOR_DELIVERY" => Some(OrderStatus::OutForDelivery),
            "COMPLETED" => Some(OrderStatus::Completed),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// The single allowed forward transition out of this state.
    pub const fn successor(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Accepted),
            OrderStatus::Accepted => Some(OrderStatus::Cooking),
            OrderStatus::Cooking => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::OutForDelivery),
            OrderStatus::OutForDelivery => Some(OrderStatus::Completed),
            OrderStatus::Completed | OrderStatus::Cancelled => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Legal moves: the fixed successor, cancellation from any non-terminal
    /// state, and a same-state no-op.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if next == self {
            return true;
        }
        if next == OrderStatus::Cancelled {
            return !self.is_terminal();
        }
        self.successor() == Some(next)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql<Text, Pg> for OrderStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for OrderStatus {
    fn from_sql(value: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(value.as_bytes())?;
        Self::parse(raw).ok_or_else(|| format!("unrecognized order status: {raw}").into())
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;
    use super::*;

    const ALL: [OrderStatus; 7] = [
        Pending,
        Accepted,
        Cooking,
        Ready,
        OutForDelivery,
        Completed,
        Cancelled,
    ];

    #[test]
    fn forward_chain_follows_the_successor_table() {
        assert_eq!(Pending.successor(), Some(Accepted));
        assert_eq!(Accepted.successor(), Some(Cooking));
        assert_eq!(Cooking.successor(), Some(Ready));
        assert_eq!(Ready.successor(), Some(OutForDelivery));
        assert_eq!(OutForDelivery.successor(), Some(Completed));
        assert_eq!(Completed.successor(), None);
        assert_eq!(Cancelled.successor(), None);
    }

    #[test]
    fn same_state_transition_is_always_a_no_op() {
        for status in ALL {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn cancellation_is_allowed_from_every_non_terminal_state() {
        for status in ALL {
            assert_eq!(status.can_transition_to(Cancelled), !status.is_terminal());
        }
        // Same-state no-op, not a transition out of the terminal state.
        assert!(Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_reject_every_other_move() {
        for terminal in [Completed, Cancelled] {
            for next in ALL {
                if next != terminal {
                    assert!(
                        !terminal.can_transition_to(next),
                        "{terminal} must not move to {next}"
                    );
                }
            }
        }
    }

    #[test]
    fn skipping_ahead_is_rejected() {
        assert!(!Pending.can_transition_to(Cooking));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Accepted.can_transition_to(Ready));
        // Moving backwards is rejected too.
        assert!(!Ready.can_transition_to(Cooking));
        assert!(!OutForDelivery.can_transition_to(Pending));
    }

    #[test]
    fn wire_names_round_trip() {
        for status in ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("DELIVERED"), None);
    }
}
