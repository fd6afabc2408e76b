pub mod course_query;
pub mod leaderboard_service;
pub mod review_service;
pub mod seed_service;
