pub mod area_service;
