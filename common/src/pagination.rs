//! Cursor based pagination.
//!
//! Edges of a [`Connection`] are always kept in the ascending cursor order,
//! regardless of the direction they were fetched in.

use std::fmt;

/// Page of nodes fetched with some [`Arguments`].
#[derive(Clone, Debug)]
pub struct Connection<C, N> {
    /// [`Edge`]s of this page, in the ascending order.
    pub edges: Vec<Edge<C, N>>,

    /// Direction this page was fetched in.
    pub direction: Direction,

    /// Whether more nodes exist past this page in its [`Direction`].
    pub has_more: bool,
}

impl<C, N> Connection<C, N> {
    /// Builds a [`Connection`] out of the fetched [`Edge`]s.
    ///
    /// Edges of a [`Direction::Backward`] page are expected in the order
    /// they were fetched (descending), and are reversed here.
    #[must_use]
    pub fn new(
        args: &Arguments<C>,
        edges: impl IntoIterator<Item = impl Into<Edge<C, N>>>,
        has_more: bool,
    ) -> Self {
        let direction = args.direction();
        let mut edges = edges.into_iter().map(Into::into).collect::<Vec<_>>();
        if direction == Direction::Backward {
            edges.reverse();
        }
        Self {
            edges,
            direction,
            has_more,
        }
    }

    /// Transforms nodes of this [`Connection`].
    #[must_use]
    pub fn map<M>(self, mut f: impl FnMut(N) -> M) -> Connection<C, M> {
        Connection {
            edges: self
                .edges
                .into_iter()
                .map(|e| Edge {
                    cursor: e.cursor,
                    node: f(e.node),
                })
                .collect(),
            direction: self.direction,
            has_more: self.has_more,
        }
    }

    /// Describes boundaries of this [`Connection`].
    #[must_use]
    pub fn page_info(&self) -> PageInfo<C>
    where
        C: Clone,
    {
        PageInfo {
            start_cursor: self.edges.first().map(|e| e.cursor.clone()),
            end_cursor: self.edges.last().map(|e| e.cursor.clone()),
            has_next_page: self.has_more
                && self.direction == Direction::Forward,
            has_previous_page: self.has_more
                && self.direction == Direction::Backward,
        }
    }
}

/// Boundaries of a [`Connection`].
#[derive(Clone, Copy, Debug)]
pub struct PageInfo<C> {
    /// Cursor of the first [`Edge`].
    pub start_cursor: Option<C>,

    /// Cursor of the last [`Edge`].
    pub end_cursor: Option<C>,

    /// Whether nodes exist after the `end_cursor`.
    pub has_next_page: bool,

    /// Whether nodes exist before the `start_cursor`.
    pub has_previous_page: bool,
}

/// Node of a [`Connection`] along with its cursor.
#[derive(Clone, Copy, Debug)]
pub struct Edge<C, N> {
    /// Position of the `node`.
    pub cursor: C,

    /// Paginated value.
    pub node: N,
}

impl<C, N> From<(C, N)> for Edge<C, N> {
    fn from((cursor, node): (C, N)) -> Self {
        Self { cursor, node }
    }
}

/// Requested page.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arguments<C> {
    /// `first` nodes strictly after the `after` cursor.
    Forward {
        /// Maximum number of nodes.
        first: usize,

        /// Exclusive lower bound.
        after: Option<C>,
    },

    /// `last` nodes strictly before the `before` cursor.
    Backward {
        /// Maximum number of nodes.
        last: usize,

        /// Exclusive upper bound.
        before: Option<C>,
    },
}

impl<C> Arguments<C> {
    /// Builds [`Arguments`] out of Relay-style parameters.
    ///
    /// Without any parameters, the `default` number of first nodes is
    /// requested. [`None`] is returned if the parameters mix directions or
    /// a count is not representable as [`usize`].
    pub fn new<Num>(
        first: Option<Num>,
        after: Option<C>,
        last: Option<Num>,
        before: Option<C>,
        default: Num,
    ) -> Option<Self>
    where
        Num: TryInto<usize> + fmt::Debug,
    {
        Some(match (first, after, last, before) {
            (first, after, None, None) => Self::Forward {
                first: first.unwrap_or(default).try_into().ok()?,
                after,
            },
            (None, None, last, Some(before)) => Self::Backward {
                last: last.unwrap_or(default).try_into().ok()?,
                before: Some(before),
            },
            (None, None, Some(last), None) => Self::Backward {
                last: last.try_into().ok()?,
                before: None,
            },
            _ => return None,
        })
    }

    /// Returns the cursor bounding the requested page, if any.
    #[must_use]
    pub fn cursor(&self) -> Option<&C> {
        match self {
            Self::Forward { after, .. } => after.as_ref(),
            Self::Backward { before, .. } => before.as_ref(),
        }
    }

    /// Returns the [`Direction`] of the requested page.
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Self::Forward { .. } => Direction::Forward,
            Self::Backward { .. } => Direction::Backward,
        }
    }

    /// Returns the maximum number of nodes on the requested page.
    #[must_use]
    pub fn limit(&self) -> usize {
        match *self {
            Self::Forward { first, .. } => first,
            Self::Backward { last, .. } => last,
        }
    }
}

/// Page request along with a filter narrowing the paginated set.
#[derive(Clone, Debug)]
pub struct Selector<C, F> {
    /// Requested page.
    pub arguments: Arguments<C>,

    /// Narrowing filter.
    pub filter: F,
}

/// Direction of pagination.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
    /// Towards greater cursors.
    Forward,

    /// Towards lesser cursors.
    Backward,
}

impl Direction {
    /// Returns the comparison operator selecting rows past a cursor.
    #[must_use]
    pub const fn operator(self) -> &'static str {
        match self {
            Self::Forward => ">",
            Self::Backward => "<",
        }
    }

    /// Returns the SQL order in which rows are fetched.
    #[must_use]
    pub const fn sql_order(self) -> &'static str {
        match self {
            Self::Forward => "ASC",
            Self::Backward => "DESC",
        }
    }
}

/// Declares pagination type aliases for a `$cursor` of a `$node` narrowed
/// by a `$filter`.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($cursor:ty, $node:ty, $filter:ty) => {
        #[doc = "[`Connection`] edge."]
        pub type Edge = $crate::pagination::Edge<$cursor, $node>;

        #[doc = "Page of nodes."]
        pub type Connection = $crate::pagination::Connection<$cursor, $node>;

        #[doc = "[`Connection`] boundaries."]
        pub type PageInfo = $crate::pagination::PageInfo<$cursor>;

        #[doc = "Requested page."]
        pub type Arguments = $crate::pagination::Arguments<$cursor>;

        #[doc = "Requested page along with a filter."]
        pub type Selector = $crate::pagination::Selector<$cursor, $filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Connection, Direction};

    #[test]
    fn defaults_to_forward() {
        let args = Arguments::<u32>::new(None, None, None, None, 20).unwrap();

        assert_eq!(
            args,
            Arguments::Forward {
                first: 20,
                after: None,
            },
        );
    }

    #[test]
    fn backward_with_cursor_only_uses_default() {
        let args = Arguments::new(None, None, None, Some(5_u32), 10).unwrap();

        assert_eq!(args.direction(), Direction::Backward);
        assert_eq!(args.limit(), 10);
        assert_eq!(args.cursor(), Some(&5));
    }

    #[test]
    fn rejects_mixed_directions() {
        assert!(Arguments::new(Some(1), Some(1_u32), Some(1), None, 10)
            .is_none());
        assert!(Arguments::new(Some(1), None, None, Some(1_u32), 10)
            .is_none());
        assert!(Arguments::<u32>::new(Some(-1), None, None, None, 10)
            .is_none());
    }

    #[test]
    fn backward_page_is_reversed() {
        let args = Arguments::Backward {
            last: 2,
            before: Some(10_u32),
        };
        let page = Connection::new(&args, [(9, "nine"), (8, "eight")], true);
        let info = page.page_info();

        assert_eq!(page.edges[0].node, "eight");
        assert_eq!(info.start_cursor, Some(8));
        assert_eq!(info.end_cursor, Some(9));
        assert!(info.has_previous_page);
        assert!(!info.has_next_page);
    }
}
