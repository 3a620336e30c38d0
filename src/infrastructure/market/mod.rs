pub mod eastmoney;
