//! Interactive numbered menu over a catalog.
//!
//! Reads whole lines so it can be driven from a pipe as well as a terminal. End of input is
//! treated like choosing Exit.

use employee_tree::catalog::{Catalog, CatalogConfig};
use employee_tree::data::Employee;
use employee_tree::error::Error;
use employee_tree::stats;

use std::io::{BufRead, Write};

const MENU: &str = "
COMPANY EMPLOYEE DETAILS:

1. Search by Experience and Salary Range
2. Insert an Employee
3. Delete an Employee
4. Find Nearest Neighbor
5. Print KD-Tree Structure
6. Calculate Total Salary
7. Calculate Middle Salary
8. Calculate Standard Deviation of Salaries
9. Save Employee Data to File
10. Load Employee Data from File
11. Exit
";

pub struct Menu<'a, R: BufRead, W: Write> {
    pub catalog: Catalog,
    config: &'a CatalogConfig,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {

    pub fn new(catalog: Catalog, config: &'a CatalogConfig, input: R, output: W) -> Self {

        return Self {
            catalog,
            config,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> Result<(), Error> {

        loop {

            write!(self.output, "{}\nEnter your choice> ", MENU)?;
            self.output.flush()?;

            let line = match self.read_line()? {
                None => break,
                Some(line) => line,
            };

            let choice = match line.trim().parse::<u32>() {
                Ok(x) => x,
                Err(_) => {
                    writeln!(self.output, "Invalid choice. Please enter a valid option.")?;
                    continue;
                },
            };

            let finished = match choice {
                1 => self.range_search()?,
                2 => self.insert()?,
                3 => self.delete()?,
                4 => self.nearest()?,
                5 => self.print_structure()?,
                6 => self.total_salary()?,
                7 => self.middle_salary()?,
                8 => self.standard_deviation()?,
                9 => self.save()?,
                10 => self.load()?,
                11 => {
                    writeln!(self.output, "Exiting the program. Goodbye!")?;
                    true
                },
                _ => {
                    writeln!(self.output, "Invalid choice. Please enter a valid option.")?;
                    false
                },
            };

            if finished {
                return Ok(());
            }
        }

        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>, Error> {

        let mut line = String::new();

        match self.input.read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string())),
        }
    }

    fn prompt(&mut self, message: &str) -> Result<Option<String>, Error> {

        write!(self.output, "{}", message)?;
        self.output.flush()?;

        return self.read_line();
    }

    /// Asks until the answer holds `count` whitespace separated integers
    fn prompt_numbers(&mut self, message: &str, count: usize) -> Result<Option<Vec<i32>>, Error> {

        loop {

            let line = match self.prompt(message)? {
                None => return Ok(None),
                Some(line) => line,
            };

            let values: Result<Vec<i32>, _> = line.split_whitespace().map(|x| x.parse::<i32>()).collect();

            match values {
                Ok(values) if values.len() == count => return Ok(Some(values)),
                _ => writeln!(self.output, "Please enter {} whole number(s).", count)?,
            }
        }
    }

    fn prompt_number(&mut self, message: &str) -> Result<Option<i32>, Error> {

        let values = self.prompt_numbers(message, 1)?;

        return Ok(values.map(|v| v[0]));
    }

    // Each action returns whether input ran out while it was prompting

    fn range_search(&mut self) -> Result<bool, Error> {

        let low = match self.prompt_numbers("Enter low experience and salary: ", 2)? {
            None => return Ok(true),
            Some(v) => Employee::point(v[0], v[1]),
        };

        let high = match self.prompt_numbers("Enter high experience and salary: ", 2)? {
            None => return Ok(true),
            Some(v) => Employee::point(v[0], v[1]),
        };

        let result = self.catalog.tree().range_search(&low, &high);

        writeln!(self.output, "Employees with experience between {} and {} and salary between {} and {} (inclusive):",
            low.experience, high.experience, low.salary, high.salary)?;

        for record in result.iter() {
            writeln!(self.output, "{}", record)?;
        }

        Ok(false)
    }

    fn insert(&mut self) -> Result<bool, Error> {

        let name = match self.prompt("Enter employee name: ")? {
            None => return Ok(true),
            Some(name) => name.trim().to_string(),
        };

        if name.is_empty() || name.contains(',') {
            writeln!(self.output, "Names must be non-empty and cannot contain commas.")?;
            return Ok(false);
        }

        let experience = match self.prompt_number("Enter employee experience: ")? {
            None => return Ok(true),
            Some(x) => x,
        };

        let salary = match self.prompt_number("Enter employee salary: ")? {
            None => return Ok(true),
            Some(x) => x,
        };

        match self.catalog.add(Employee::new(&name, experience, salary)) {
            Ok(()) => writeln!(self.output, "Employee added successfully.")?,
            Err(e @ Error::DuplicateName(_)) => writeln!(self.output, "{}", e)?,
            Err(e) => return Err(e),
        }

        Ok(false)
    }

    fn delete(&mut self) -> Result<bool, Error> {

        let name = match self.prompt("Enter the name of the employee to delete: ")? {
            None => return Ok(true),
            Some(name) => name.trim().to_string(),
        };

        match self.catalog.remove(&name) {
            true => writeln!(self.output, "Employee deleted successfully.")?,
            false => writeln!(self.output, "{}", Error::NotFound(name))?,
        }

        Ok(false)
    }

    fn nearest(&mut self) -> Result<bool, Error> {

        let name = match self.prompt("Enter target employee name: ")? {
            None => return Ok(true),
            Some(name) => name.trim().to_string(),
        };

        let experience = match self.prompt_number("Enter target employee experience: ")? {
            None => return Ok(true),
            Some(x) => x,
        };

        let salary = match self.prompt_number("Enter target employee salary: ")? {
            None => return Ok(true),
            Some(x) => x,
        };

        let target = Employee::new(&name, experience, salary);

        let nearest = match self.config.nearest_exact {
            true => self.catalog.tree().nearest(&target),
            false => self.catalog.tree().approximate_nearest(&target),
        };

        match nearest {
            None => writeln!(self.output, "{}", Error::EmptyIndex)?,
            Some(record) => {
                writeln!(self.output, "Nearest neighbor to {} (Experience: {}, Salary: {}):", name, experience, salary)?;
                writeln!(self.output, "{}", record)?;
            },
        }

        Ok(false)
    }

    fn print_structure(&mut self) -> Result<bool, Error> {

        writeln!(self.output, "KD-Tree Structure:")?;
        write!(self.output, "{}", self.catalog.tree())?;

        Ok(false)
    }

    fn total_salary(&mut self) -> Result<bool, Error> {

        let totals = stats::total_salary(self.catalog.tree());
        writeln!(self.output, "Total salary of all {} employees: {}", totals.count, totals.sum)?;

        Ok(false)
    }

    fn middle_salary(&mut self) -> Result<bool, Error> {

        match stats::median_like_salary(self.catalog.tree()) {
            Ok(value) => writeln!(self.output, "Middle salary of all employees: {}", value)?,
            Err(Error::EmptyIndex) => writeln!(self.output, "{}", Error::EmptyIndex)?,
            Err(e) => return Err(e),
        }

        Ok(false)
    }

    fn standard_deviation(&mut self) -> Result<bool, Error> {

        let tree = self.catalog.tree();

        let result = stats::mean_salary(tree).and_then(|mean| stats::salary_stddev(tree, mean));

        match result {
            Ok(value) => writeln!(self.output, "Standard deviation of salaries: {}", value)?,
            Err(Error::EmptyIndex) => writeln!(self.output, "{}", Error::EmptyIndex)?,
            Err(e) => return Err(e),
        }

        Ok(false)
    }

    fn filename(&mut self, message: &str) -> Result<Option<String>, Error> {

        let answer = match self.prompt(message)? {
            None => return Ok(None),
            Some(x) => x.trim().to_string(),
        };

        match answer.is_empty() {
            true => Ok(Some(self.config.data_file.clone())),
            false => Ok(Some(answer)),
        }
    }

    fn save(&mut self) -> Result<bool, Error> {

        let filename = match self.filename("Enter filename to save employee data: ")? {
            None => return Ok(true),
            Some(x) => x,
        };

        match self.catalog.save(&filename) {
            Ok(()) => writeln!(self.output, "Employee data saved to {}", filename)?,
            Err(e) => writeln!(self.output, "Unable to open the file for writing: {}", e)?,
        }

        Ok(false)
    }

    fn load(&mut self) -> Result<bool, Error> {

        let filename = match self.filename("Enter filename to load employee data: ")? {
            None => return Ok(true),
            Some(x) => x,
        };

        match self.catalog.load(&filename) {
            Ok(()) => writeln!(self.output, "Employee data loaded from {} ({} employees)", filename, self.catalog.len())?,
            Err(e) => writeln!(self.output, "Unable to read {}: {}", filename, e)?,
        }

        Ok(false)
    }
}
