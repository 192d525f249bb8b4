//! Integration tests exercising the allocators through the public crate.

mod helpers;

mod counter_test;
mod redis_test;
mod room_test;
mod sequential_test;
