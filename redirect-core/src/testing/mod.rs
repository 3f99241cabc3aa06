pub mod mock_host;
