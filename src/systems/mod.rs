pub mod video_system;
