pub mod pose_helper;
