pub mod company;
pub mod customer;
pub mod order;
pub mod order_counter;
pub mod order_photo;
pub mod order_status_history;
pub mod order_task;
pub mod order_task_part;
pub mod part;
pub mod user;
pub mod vehicle;
pub mod warranty;
