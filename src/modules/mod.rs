pub mod pose_client;
