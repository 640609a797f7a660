use sea_orm::{
    EntityTrait, Order, QueryOrder, QuerySelect, Select,
    sea_query::{Func, SimpleExpr},
};

use roomshare_domain::pagination::PageRequest;

pub trait OrderByRandom {
    fn order_by_random(self) -> Self;
}

impl<E> OrderByRandom for Select<E>
where
    E: EntityTrait,
{
    fn order_by_random(mut self) -> Self {
        QueryOrder::query(&mut self)
            .order_by_expr(SimpleExpr::FunctionCall(Func::random()), Order::Desc);
        self
    }
}

/// Apply `LIMIT`/`OFFSET` from a [`PageRequest`].
pub trait Paginate {
    fn with_page(self, page: PageRequest) -> Self;
}

impl<E> Paginate for Select<E>
where
    E: EntityTrait,
{
    fn with_page(self, page: PageRequest) -> Self {
        self.offset(page.offset()).limit(page.limit())
    }
}
