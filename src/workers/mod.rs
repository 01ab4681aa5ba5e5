pub mod schedule_worker;

pub use schedule_worker::ScheduleWorker;
