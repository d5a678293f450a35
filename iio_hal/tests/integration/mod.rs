mod activation;
mod fixture;
mod poll;
mod shared_device;
