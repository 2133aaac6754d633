use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Subscription};
use futures::Stream;

pub type ProjectSchema = async_graphql::Schema<Query, EmptyMutation, EmptySubscription>;
pub type ProjectEventSchema = async_graphql::Schema<Query, EmptyMutation, ProjectEvents>;

/// Counts how many times the resolvers producing data actually ran.
#[derive(Clone, Default)]
pub struct ResolverCalls(Arc<AtomicUsize>);

impl ResolverCalls {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn record(ctx: &Context<'_>) {
        if let Some(calls) = ctx.data_opt::<ResolverCalls>() {
            calls.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Default)]
pub struct Query;

#[Object]
impl Query {
    async fn project(&self, ctx: &Context<'_>, id: Option<i32>) -> Option<Project> {
        ResolverCalls::record(ctx);
        let id = id.unwrap_or(1);
        Some(Project {
            id,
            name: format!("Project {id}"),
        })
    }

    async fn projects(&self) -> Option<Vec<Option<Project>>> {
        Some(
            (1..=2)
                .map(|id| {
                    Some(Project {
                        id,
                        name: format!("Project {id}"),
                    })
                })
                .collect(),
        )
    }

    /// `[ProjectType!]`, items can not be null.
    async fn archived_projects(&self) -> Option<Vec<Project>> {
        Some(
            (3..=4)
                .map(|id| Project {
                    id,
                    name: format!("Project {id}"),
                })
                .collect(),
        )
    }
}

#[derive(Default)]
pub struct ProjectEvents;

#[Subscription]
impl ProjectEvents {
    async fn project_updates(&self) -> impl Stream<Item = Project> {
        futures::stream::iter((1..=2).map(|id| Project {
            id,
            name: format!("Project {id}"),
        }))
    }
}

pub struct Project {
    id: i32,
    name: String,
}

#[Object(name = "ProjectType")]
impl Project {
    async fn id(&self) -> i32 {
        self.id
    }

    async fn name(&self, ctx: &Context<'_>) -> Option<&str> {
        ResolverCalls::record(ctx);
        Some(&self.name)
    }

    async fn members(&self) -> Option<Vec<Option<Member>>> {
        Some(
            (1..=2)
                .map(|id| {
                    Some(Member {
                        id,
                        name: format!("Project {}, Member: {id}", self.id),
                    })
                })
                .collect(),
        )
    }
}

pub struct Member {
    id: i32,
    name: String,
}

#[Object(name = "MemberType")]
impl Member {
    async fn id(&self) -> Option<i32> {
        Some(self.id)
    }

    async fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    async fn tickets(&self) -> Option<Vec<Option<Ticket>>> {
        Some(
            (1..=4)
                .map(|id| {
                    Some(Ticket {
                        id,
                        message: format!("Member {}, Ticket: {id}", self.id),
                    })
                })
                .collect(),
        )
    }
}

pub struct Ticket {
    id: i32,
    message: String,
}

#[Object(name = "TicketType")]
impl Ticket {
    async fn id(&self) -> Option<i32> {
        Some(self.id)
    }

    async fn message(&self, ctx: &Context<'_>) -> Option<&str> {
        ResolverCalls::record(ctx);
        Some(&self.message)
    }
}
